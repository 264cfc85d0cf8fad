use chrono::{Local, NaiveTime};
use colored::*;
use std::fmt;
use std::io::IsTerminal;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

// Used when RUST_LOG is unset
const DEFAULT_FILTER: &str =
    "dex_price_logger=info,price_logger=info,dex_bridge=info,tokio_tungstenite=warn,tungstenite=warn";

/// Event formatter producing `[HH:MM:SS.mmm] LEVEL message`
#[derive(Debug, Clone, Copy, Default)]
pub struct MillisecondFormatter;

impl<S, N> FormatEvent<S, N> for MillisecondFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();
        write_prefix(&mut writer, Local::now().time(), event.metadata().level(), ansi)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Write the `[HH:MM:SS.mmm] LEVEL ` prefix of a log line
pub fn write_prefix<W: fmt::Write>(
    writer: &mut W,
    time: NaiveTime,
    level: &Level,
    ansi: bool,
) -> fmt::Result {
    let name = level.to_string();
    let label = if ansi {
        match *level {
            Level::ERROR => name.as_str().red().bold().to_string(),
            Level::WARN => name.as_str().yellow().to_string(),
            Level::INFO => name.as_str().green().to_string(),
            Level::DEBUG => name.as_str().blue().to_string(),
            Level::TRACE => name.as_str().bright_black().to_string(),
        }
    } else {
        name
    };

    write!(writer, "[{}] {} ", time.format(TIME_FORMAT), label)
}

/// Install the global console subscriber writing to stdout
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .event_format(MillisecondFormatter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::formatter::PriceFormatter;
    use crate::types::{StreamData, TokenBatch, TokenProfile};
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl CapturedOutput {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn formatter_writes_full_price_line() {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .event_format(MillisecondFormatter)
            .finish();

        let data = StreamData::Tokens(TokenBatch {
            tokens: vec![TokenProfile {
                symbol: Some("TRAV".to_string()),
                price: Some(0.5),
                change_24h: Some(3.5),
                ..Default::default()
            }],
            timestamp: None,
        });
        let formatter = PriceFormatter::new("trav");

        tracing::subscriber::with_default(subscriber, || formatter.display(&data));

        let logged = output.contents();
        let line = logged.strip_suffix('\n').unwrap();
        assert_eq!(logged.lines().count(), 1);

        // [HH:MM:SS.mmm]
        let stamp = &line.as_bytes()[..14];
        assert_eq!(stamp[0], b'[');
        assert_eq!(stamp[13], b']');
        for (i, byte) in stamp[1..13].iter().enumerate() {
            match i {
                2 | 5 => assert_eq!(*byte, b':'),
                8 => assert_eq!(*byte, b'.'),
                _ => assert!(byte.is_ascii_digit()),
            }
        }

        assert_eq!(
            &line[14..],
            " INFO Price trav: 0.50000000 USD, 24h: +3.50% (pair: —, symbol: TRAV)"
        );
    }

    #[test]
    fn prefix_has_millisecond_timestamp_and_level() {
        let time = NaiveTime::from_hms_milli_opt(9, 5, 3, 7).unwrap();
        let mut line = String::new();

        write_prefix(&mut line, time, &Level::INFO, false).unwrap();

        assert_eq!(line, "[09:05:03.007] INFO ");
    }

    #[test]
    fn prefix_keeps_plain_level_names() {
        let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap();

        for (level, name) in [
            (Level::WARN, "WARN"),
            (Level::ERROR, "ERROR"),
            (Level::DEBUG, "DEBUG"),
        ] {
            let mut line = String::new();
            write_prefix(&mut line, time, &level, false).unwrap();
            assert_eq!(line, format!("[23:59:59.999] {} ", name));
        }
    }
}

use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Event formatter that wraps each field in brackets
/// Format: [TIMESTAMP] [LEVEL] [STAGE] [TARGET:LINE]: MESSAGE
///
/// STAGE is the chain of open spans joined with `/` (the run units open
/// `balance_by_region` or `split_dataset`), or `-` outside any stage.
pub struct BracketedFormatter;

impl<S, N> FormatEvent<S, N> for BracketedFormatter
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
        let metadata = event.metadata();

        write!(
            writer,
            "[{}] [{:5}] ",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            metadata.level()
        )?;

        let stage = ctx
            .event_scope()
            .map(|scope| {
                scope
                    .from_root()
                    .map(|span| span.name())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| "-".to_string());
        write!(writer, "[{}] ", stage)?;

        match metadata.line() {
            Some(line) => write!(writer, "[{}:{}]: ", metadata.target(), line)?,
            None => write!(writer, "[{}]: ", metadata.target())?,
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::{info, info_span};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(BracketedFormatter)
            .with_writer(out.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.contents()
    }

    #[test]
    fn test_stage_span_is_bracketed() {
        let line = capture(|| {
            let _span = info_span!("split_dataset").entered();
            info!("Split 120 rows");
        });
        assert!(line.contains("[INFO ] [split_dataset] ["));
        assert!(line.ends_with("]: Split 120 rows\n"));
    }

    #[test]
    fn test_nested_stages_and_no_stage() {
        let lines = capture(|| {
            info!("outside");
            let _outer = info_span!("region_split").entered();
            let _inner = info_span!("balance_by_region").entered();
            info!("inside");
        });
        let lines: Vec<&str> = lines.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[INFO ] [-] "));
        assert!(lines[1].contains("[region_split/balance_by_region]"));
    }
}

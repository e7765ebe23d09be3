//! Integration tests for tracing spans and events
//!
//! The codec reports skipped input through `tracing`, never on stdout.
//! These tests capture the formatted events of a scoped subscriber.

use std::io;
use std::sync::{Arc, Mutex};

use processmap::decode;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut bytes) = self.0.lock() {
            bytes.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

const DANGLING: &str = r#"<mxfile><diagram id="d" name="n"><mxGraphModel><root>
<mxCell id="0"/><mxCell id="1" parent="0"/>
<mxCell id="a" parent="1" vertex="1"/>
<mxCell id="a" parent="1" vertex="1"/>
<mxCell id="e" parent="1" edge="1" source="a" target="ghost"/>
</root></mxGraphModel></diagram></mxfile>"#;

#[test]
fn test_skipped_cells_are_logged() {
    let capture = Capture::default();
    let _guard = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let diagram = decode(DANGLING).unwrap();
    assert_eq!(diagram.elements().len(), 1);
    assert!(diagram.connections().is_empty());

    let logs = capture.contents();
    assert!(logs.contains("decode_drawio"));
    assert!(logs.contains("Skipping cell with duplicate id"));
    assert!(logs.contains("Edge references a missing element"));
    assert!(logs.contains("Inferred notation"));
}

#[test]
fn test_decode_without_subscriber() {
    let diagram = decode(DANGLING).unwrap();
    assert_eq!(diagram.id, "d");
}

#![no_main]
use libfuzzer_sys::fuzz_target;
use revdelta::delta::generator::{DeltaGenerator, GeneratorOptions};
use revdelta::delta::window::{DeltaInstruction, DeltaSink};
use revdelta::io::StreamSource;

/// Applies the instruction stream back onto the source.
#[derive(Default)]
struct ApplySink {
    source: Vec<u8>,
    output: Vec<u8>,
    window_offset: u64,
}

impl DeltaSink for ApplySink {
    fn window_begin(&mut self, source_offset: u64) -> std::io::Result<()> {
        self.window_offset = source_offset;
        Ok(())
    }

    fn instruction(&mut self, inst: DeltaInstruction<'_>) -> std::io::Result<()> {
        match inst {
            DeltaInstruction::CopySource { offset, len } => {
                let start = self.window_offset as usize + offset;
                self.output.extend_from_slice(&self.source[start..start + len]);
            }
            DeltaInstruction::Insert { data } => self.output.extend_from_slice(data),
        }
        Ok(())
    }

    fn window_end(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn stream_end(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the window size, second the source/target split.
    let window_size = 16 + (data[0] as usize) * 8;
    let split = (data[1] as usize * data.len()) / 256;
    let payload = &data[2..];
    let split = split.min(payload.len());
    let (source, target) = payload.split_at(split);

    let mut sink = ApplySink {
        source: source.to_vec(),
        ..Default::default()
    };
    let generator = DeltaGenerator::new(GeneratorOptions {
        window_size,
        ..Default::default()
    });
    generator
        .run(
            &mut StreamSource::new(source),
            &mut StreamSource::new(target),
            &mut sink,
        )
        .expect("delta pass failed");

    assert_eq!(sink.output, target, "roundtrip mismatch");
});

// ABOUTME: Benchmark/round-trip CLI: decodes a BONJSON file and re-encodes it (or discards it).
// ABOUTME: An external collaborator of the core crate, not part of the codec itself.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bonjson_core::{decode, BigNumber, Encoder, Error, Sink, Visitor};
use clap::Parser;

/// Decode a BONJSON document and re-encode it (round-trip), or just decode it.
#[derive(Parser, Debug)]
#[command(name = "bonjson-bench", version, about)]
struct Args {
    /// Path to the input BONJSON file.
    input: PathBuf,

    /// Path to write the re-encoded output to. Ignored with --decode-only.
    output: Option<PathBuf>,

    /// Decode only; skip re-encoding and ignore any output path.
    #[arg(long)]
    decode_only: bool,
}

/// Discards every event. Used in `--decode-only` mode to exercise the
/// decoder's dispatch loop without paying for re-encoding.
struct NullVisitor;

impl Visitor for NullVisitor {
    type Error = std::convert::Infallible;
    fn visit_null(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_bool(&mut self, _: bool) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_i64(&mut self, _: i64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_u64(&mut self, _: u64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_f64(&mut self, _: f64) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_big_number(&mut self, _: BigNumber) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_str(&mut self, _: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_begin_array(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_begin_object(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_end_container(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn visit_end_data(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Drives an [`Encoder`] from decode events, re-emitting the document as it
/// is parsed rather than building an intermediate tree.
struct ReEncode<S: Sink>(Encoder<S>);

impl<S: Sink> Visitor for ReEncode<S> {
    type Error = Error<S::Error>;

    fn visit_null(&mut self) -> Result<(), Self::Error> {
        self.0.add_null()
    }
    fn visit_bool(&mut self, value: bool) -> Result<(), Self::Error> {
        self.0.add_bool(value)
    }
    fn visit_i64(&mut self, value: i64) -> Result<(), Self::Error> {
        self.0.add_signed_int(value)
    }
    fn visit_u64(&mut self, value: u64) -> Result<(), Self::Error> {
        self.0.add_unsigned_int(value)
    }
    fn visit_f64(&mut self, value: f64) -> Result<(), Self::Error> {
        self.0.add_float(value)
    }
    fn visit_big_number(&mut self, value: BigNumber) -> Result<(), Self::Error> {
        self.0.add_big_number(value)
    }
    fn visit_str(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.add_string(bytes)
    }
    fn visit_begin_array(&mut self) -> Result<(), Self::Error> {
        self.0.begin_array()
    }
    fn visit_begin_object(&mut self) -> Result<(), Self::Error> {
        self.0.begin_object()
    }
    fn visit_end_container(&mut self) -> Result<(), Self::Error> {
        self.0.end_container()
    }
    fn visit_end_data(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn run(args: &Args) -> Result<(), String> {
    let data = fs::read(&args.input)
        .map_err(|e| format!("reading {}: {e}", args.input.display()))?;
    log::info!("read {} bytes from {}", data.len(), args.input.display());

    if args.decode_only {
        let (consumed, result) = decode(&data, &mut NullVisitor);
        result.map_err(|e| format!("decoding {}: {e} (at byte {consumed})", args.input.display()))?;
        log::info!("decoded {consumed} bytes, no output requested");
        return Ok(());
    }

    let output_path = args
        .output
        .clone()
        .ok_or_else(|| "an output path is required unless --decode-only is set".to_string())?;
    let file = fs::File::create(&output_path)
        .map_err(|e| format!("creating {}: {e}", output_path.display()))?;
    let writer = BufWriter::new(file);
    let mut visitor = ReEncode(Encoder::new(writer));

    let (consumed, result) = decode(&data, &mut visitor);
    result.map_err(|e| format!("decoding {}: {e} (at byte {consumed})", args.input.display()))?;

    let (mut writer, result) = visitor.0.end();
    result.map_err(|e| format!("finishing {}: {e}", output_path.display()))?;
    writer
        .flush()
        .map_err(|e| format!("flushing {}: {e}", output_path.display()))?;

    log::info!(
        "round-tripped {consumed} bytes from {} to {}",
        args.input.display(),
        output_path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            log::error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

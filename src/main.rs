// midikit CLI - inspect and transform Standard MIDI Files

use midikit::sequencer::TempoMap;
use midikit::{MultiTrack, clip_to_duration, compress_leading_silence, multitrack_as_text};
use std::process::ExitCode;

struct Options {
    input: String,
    compress: bool,
    clip_secs: Option<f64>,
    output: Option<String>,
}

fn print_usage() {
    println!("Usage: midikit <file.mid> [options]");
    println!();
    println!("Options:");
    println!("  --compress         collapse the leading silence to single ticks");
    println!("  --clip <seconds>   truncate to the given duration (inclusive boundary)");
    println!("  --out <file.mid>   write the result instead of printing the event report");
}

fn parse_args(mut args: std::env::Args) -> Option<Options> {
    args.next(); // program name
    let input = args.next()?;

    let mut options = Options {
        input,
        compress: false,
        clip_secs: None,
        output: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--compress" => options.compress = true,
            "--clip" => {
                let value = args.next()?;
                options.clip_secs = Some(value.parse().ok()?);
            }
            "--out" => options.output = Some(args.next()?),
            _ => return None,
        }
    }
    Some(options)
}

fn run(options: &Options) -> midikit::Result<()> {
    let mut mt = midikit::io::read_file(&options.input)?;

    if options.compress {
        let mut compressed = MultiTrack::default();
        compress_leading_silence(&mt, &mut compressed)?;
        mt = compressed;
    }
    if let Some(max_secs) = options.clip_secs {
        let mut clipped = MultiTrack::default();
        clip_to_duration(&mt, &mut clipped, max_secs)?;
        mt = clipped;
    }

    match &options.output {
        Some(path) => {
            midikit::io::write_file(&mt, path)?;
            println!("Wrote {} ({} tracks with events)", path, mt.tracks_with_events());
        }
        None => {
            print!("{}", multitrack_as_text(&mt));
            let duration = TempoMap::from_multitrack(&mt).duration_secs(&mt);
            println!("Duration  {duration:.3} s");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let Some(options) = parse_args(std::env::args()) else {
        print_usage();
        return ExitCode::FAILURE;
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("ERROR: {error}");
            ExitCode::FAILURE
        }
    }
}

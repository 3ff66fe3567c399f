use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lbrn_export::batch::{BatchOptions, run_batch};
use lbrn_export::convert::{ConvertOptions, OutputFormat, OutputSource, convert_file};
use lbrn_export::lbrn::MIN_OUTPUT_SIZE;
use lbrn_export::thumbnail::ThumbnailMode;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lbrn-export")]
#[command(about = "Export LightBurn .lbrn/.lbrn2 projects to SVG or PNG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single project
    Convert {
        /// Input .lbrn or .lbrn2 file
        input: PathBuf,
        /// Output file (default: input with the format's extension)
        output: Option<PathBuf>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Convert many projects into a subfolder next to each one
    Batch {
        /// Project files or directories to search recursively
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output subfolder created next to each input
        #[arg(long, default_value = "png")]
        subfolder: String,
        /// Keep existing outputs instead of overwriting them
        #[arg(long = "no-overwrite")]
        no_overwrite: bool,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Png)]
    format: FormatArg,
    /// How embedded bitmaps are stored in SVG output
    #[arg(long, value_enum, default_value_t = ImagesArg::Inline)]
    images: ImagesArg,
    /// Keep the canvas size instead of scaling the smaller side to 1080
    #[arg(long = "no-scale")]
    no_scale: bool,
    /// Upscale thumbnail fallbacks instead of writing them verbatim
    #[arg(long = "upscale-thumbnail")]
    upscale_thumbnail: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

#[derive(Clone, Copy, ValueEnum)]
enum ImagesArg {
    /// data: URIs inside the SVG
    Inline,
    /// Files written next to the output
    Files,
}

impl From<&RenderArgs> for ConvertOptions {
    fn from(args: &RenderArgs) -> Self {
        Self {
            format: match args.format {
                FormatArg::Png => OutputFormat::Png,
                FormatArg::Svg => OutputFormat::Svg,
            },
            sibling_images: matches!(args.images, ImagesArg::Files),
            min_output_size: (!args.no_scale).then_some(MIN_OUTPUT_SIZE),
            thumbnail: if args.upscale_thumbnail {
                ThumbnailMode::Upscale {
                    min_size: MIN_OUTPUT_SIZE as u32,
                }
            } else {
                ThumbnailMode::Raw
            },
            ..Default::default()
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Commands::Convert {
            input,
            output,
            render,
        } => match convert_file(&input, output.as_deref(), &ConvertOptions::from(&render)) {
            Ok(converted) => {
                let via = match converted.source {
                    OutputSource::Vector { .. } => "",
                    OutputSource::Thumbnail => " (embedded thumbnail)",
                };
                println!(
                    "Successfully converted '{}' to '{}'{}",
                    input.display(),
                    converted.output.display(),
                    via
                );
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                e.exit_code()
            }
        },
        Commands::Batch {
            paths,
            subfolder,
            no_overwrite,
            render,
        } => {
            let options = BatchOptions {
                subfolder,
                overwrite: !no_overwrite,
                convert: ConvertOptions::from(&render),
            };
            let report = run_batch(&paths, &options);
            println!(
                "Converted {}/{} files ({} skipped, {} failed)",
                report.succeeded(),
                report.total(),
                report.skipped(),
                report.failed()
            );
            if report.failed() == 0 { 0 } else { 1 }
        }
    };

    process::exit(code);
}

use clap::{Parser, Subcommand};
use cmds::analyze::IrOutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmds;

#[derive(Parser)]
#[command(name = "pbuild-gen")]
#[command(about = "Streaming protobuf Builder generator", long_about = None)]
struct Cli {
    /* Log at debug level (RUST_LOG takes precedence) */
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate Rust Builders from schema files */
    Codegen {
        /* YAML schemas or binary FileDescriptorSets */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Output directory for generated code */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        /* Path generated code uses for the wire runtime */
        #[arg(long = "runtime-crate", value_name = "PATH")]
        runtime_crate: Option<String>,
    },

    /* Show identities, field plans and nested Builders for schema files */
    Analyze {
        /* YAML schemas or binary FileDescriptorSets */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Print the Builder IR after analysis */
        #[arg(long = "print-ir")]
        print_ir: bool,

        /* Format to use when printing the Builder IR */
        #[arg(long = "ir-format", value_enum, default_value = "json")]
        ir_format: IrOutputFormat,
    },

    /* Run as a protoc plugin (CodeGeneratorRequest on stdin) */
    Plugin,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Codegen {
            files,
            output_dir,
            runtime_crate,
        } => {
            cmds::codegen::run(files, output_dir, runtime_crate, cli.verbose)?;
        }

        Commands::Analyze {
            files,
            print_ir,
            ir_format,
        } => {
            cmds::analyze::run(files, print_ir, ir_format)?;
        }

        Commands::Plugin => {
            cmds::plugin::run()?;
        }
    }

    Ok(())
}

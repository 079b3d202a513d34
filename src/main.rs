//! fragcov: fragment coverage from paired-end alignments
//!
//! Usage: fragcov <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

use fragcov::alignment::{AlignmentPreparer, AsIs, Samtools};
use fragcov::commands::{CountsCommand, LengthDistCommand, ParseBowtieCommand, ParseSamCommand};
use fragcov::config::{
    CenterPolicy, PairingMode, StrandMode, DEFAULT_MAX_FRAGMENT_LENGTH, DEFAULT_SEED,
};
use fragcov::error::{PipelineError, Result};
use fragcov::genome::ChromosomeLengths;

#[derive(Parser)]
#[command(name = "fragcov")]
#[command(version)]
#[command(about = "Fragment summaries, center coverage and length distributions from paired-end alignments", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Print run statistics to stderr
    #[arg(long, global = true)]
    stats: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair Bowtie alignments and write read summaries
    ParseBowtie {
        /// Bowtie output (use - for stdin)
        input: PathBuf,

        /// Treat every alignment as its own fragment
        #[arg(long)]
        single_end: bool,

        /// Drop alignments whose mate is missing
        #[arg(long)]
        drop_orphans: bool,

        /// Report the leftmost read's strand instead of '+'
        #[arg(long)]
        observed_strand: bool,
    },

    /// Write read summaries from a SAM or BAM file
    ParseSam {
        /// SAM or BAM input
        input: PathBuf,

        /// Remove PCR duplicates after sorting
        #[arg(long)]
        rmdup: bool,

        /// samtools executable
        #[arg(long, default_value = "samtools")]
        samtools: PathBuf,

        /// Read the input as given, without conversion or sorting
        #[arg(long, conflicts_with = "rmdup")]
        no_prepare: bool,

        /// Report the read's strand instead of '+'
        #[arg(long)]
        observed_strand: bool,
    },

    /// Bin fragment centers into per-base coverage tracks
    Counts {
        /// Read summaries; several files are binned in parallel and summed
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Give odd-length fragments to one of the two center bases at random
        #[arg(long)]
        randomize: bool,

        /// Seed for --randomize
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Chromosome lengths file (name<TAB>length per line, in chromosome order)
        #[arg(short = 'g', long)]
        genome: Option<PathBuf>,
    },

    /// Tabulate fragment lengths
    LengthDist {
        /// Read summaries (use - for stdin)
        input: PathBuf,

        /// Skip fragments longer than this
        #[arg(long, default_value_t = DEFAULT_MAX_FRAGMENT_LENGTH)]
        max_length: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fragcov=debug,info")
    } else {
        EnvFilter::new("fragcov=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::ParseBowtie {
            input,
            single_end,
            drop_orphans,
            observed_strand,
        } => run_parse_bowtie(input, single_end, drop_orphans, observed_strand, cli.stats),

        Commands::ParseSam {
            input,
            rmdup,
            samtools,
            no_prepare,
            observed_strand,
        } => run_parse_sam(input, rmdup, samtools, no_prepare, observed_strand, cli.stats),

        Commands::Counts {
            inputs,
            randomize,
            seed,
            genome,
        } => run_counts(inputs, randomize, seed, genome, cli.stats),

        Commands::LengthDist { input, max_length } => {
            run_length_dist(input, max_length, cli.stats)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn run_parse_bowtie(
    input: PathBuf,
    single_end: bool,
    drop_orphans: bool,
    observed_strand: bool,
    stats: bool,
) -> Result<()> {
    let mode = if single_end {
        PairingMode::SingleEnd
    } else {
        PairingMode::Paired
    };
    let cmd = ParseBowtieCommand::new()
        .with_mode(mode)
        .with_keep_orphans(!drop_orphans)
        .with_strand_mode(StrandMode::from_ignore_flag(!observed_strand));

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let result = if is_stdin(&input) {
        cmd.run_stdin(&mut handle)?
    } else {
        cmd.run(&input, &mut handle)?
    };
    if stats {
        eprintln!("parse-bowtie stats: {}", result);
    }
    Ok(())
}

fn run_parse_sam(
    input: PathBuf,
    rmdup: bool,
    samtools: PathBuf,
    no_prepare: bool,
    observed_strand: bool,
    stats: bool,
) -> Result<()> {
    let cmd = ParseSamCommand::new()
        .with_strand_mode(StrandMode::from_ignore_flag(!observed_strand));
    let preparer: Box<dyn AlignmentPreparer> = if no_prepare {
        Box::new(AsIs)
    } else {
        Box::new(Samtools {
            program: samtools,
            rmdup,
        })
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let result = cmd.run(&input, &*preparer, &mut handle)?;
    if stats {
        eprintln!("parse-sam stats: {}", result);
    }
    Ok(())
}

fn run_counts(
    inputs: Vec<PathBuf>,
    randomize: bool,
    seed: u64,
    genome: Option<PathBuf>,
    stats: bool,
) -> Result<()> {
    let lengths = match genome {
        Some(path) => ChromosomeLengths::from_file(&path)?,
        None => ChromosomeLengths::default(),
    };
    let cmd = CountsCommand::new()
        .with_lengths(lengths)
        .with_policy(CenterPolicy::from_randomize_flag(randomize))
        .with_seed(seed);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let result = match inputs.as_slice() {
        [single] if is_stdin(single) => cmd.run_stdin(&mut handle)?,
        [single] => cmd.run(single, &mut handle)?,
        many => {
            if many.iter().any(|p| is_stdin(p)) {
                return Err(PipelineError::InvalidFormat(
                    "stdin cannot be combined with other inputs".to_string(),
                ));
            }
            cmd.run_shards(many, &mut handle)?
        }
    };
    if stats {
        eprintln!("counts stats: {}", result);
    }
    Ok(())
}

fn run_length_dist(input: PathBuf, max_length: u64, stats: bool) -> Result<()> {
    let cmd = LengthDistCommand::new().with_max_length(max_length);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let result = if is_stdin(&input) {
        cmd.run_stdin(&mut handle)?
    } else {
        cmd.run(&input, &mut handle)?
    };
    if stats {
        eprintln!("length-dist stats: {}", result);
    }
    Ok(())
}

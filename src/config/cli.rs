use crate::config::toml_config::{RemoteConfig, SorterConfig};
use crate::domain::model::{SortLayout, SortMode};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "file-sorter")]
#[command(about = "Guess the syllabus subject of course files from their names")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Syllabus JSON file, overrides the configuration
    #[arg(short, long, global = true)]
    pub syllabus: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Classify one or more filenames
    Classify {
        #[arg(required = true)]
        names: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sort every file of a directory under its subject
    Sort {
        input_dir: String,

        #[arg(short, long)]
        output: Option<String>,

        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Output folders named by subject code or by snake_case subject name
        #[arg(short, long, value_enum)]
        layout: Option<LayoutArg>,

        /// Report formats (json, csv, tsv)
        #[arg(short, long, value_delimiter = ',')]
        format: Vec<String>,

        #[arg(short, long)]
        recursive: bool,

        /// Ask a remote sort service instead of the local syllabus
        #[arg(long, num_args = 0..=1, default_missing_value = crate::adapters::remote::DEFAULT_SORT_ENDPOINT)]
        remote: Option<String>,

        /// Show what would be sorted without touching any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the keyword index built from the syllabus
    Index {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Report,
    Copy,
    Move,
}

impl From<ModeArg> for SortMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Report => SortMode::Report,
            ModeArg::Copy => SortMode::Copy,
            ModeArg::Move => SortMode::Move,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Code,
    Name,
}

impl From<LayoutArg> for SortLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Code => SortLayout::SubjectCode,
            LayoutArg::Name => SortLayout::SubjectName,
        }
    }
}

impl CliConfig {
    /// Applies command line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut SorterConfig) {
        if let Some(syllabus) = &self.syllabus {
            config.syllabus.path = syllabus.clone();
        }

        if let Command::Sort {
            output,
            mode,
            layout,
            format,
            recursive,
            remote,
            dry_run,
            ..
        } = &self.command
        {
            if let Some(output) = output {
                config.sort.output_path = output.clone();
            }
            if let Some(mode) = mode {
                config.sort.mode = (*mode).into();
            }
            if *dry_run {
                config.sort.mode = SortMode::Report;
            }
            if let Some(layout) = layout {
                config.sort.layout = (*layout).into();
            }
            if !format.is_empty() {
                config.sort.report_formats = Some(format.clone());
            }
            if *recursive {
                config.sort.recursive = Some(true);
            }
            if let Some(endpoint) = remote {
                let timeout_seconds = config.remote.as_ref().and_then(|r| r.timeout_seconds);
                config.remote = Some(RemoteConfig {
                    endpoint: endpoint.clone(),
                    timeout_seconds,
                });
            }
        }
    }

    /// Whether `sort` should go through the remote service.
    pub fn use_remote(&self) -> bool {
        matches!(&self.command, Command::Sort { remote: Some(_), .. })
    }
}

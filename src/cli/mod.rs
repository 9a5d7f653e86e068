//! Command-line interface for subgroup_center

use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "subgroup_center")]
#[command(version)]
#[command(about = "Subgroup-specific gene centering for gene-expression matrices")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 't', long, global = true, default_value = "0")]
    pub threads: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate per-group quantiles of each gene's global median
    #[command(
        long_about = "Estimate per-group quantiles of each gene's global median.\n\n\
            For every gene and every group label, evaluates the empirical CDF of the\n\
            group's samples at the gene's median over all samples.",
        after_long_help = "\
Examples:
  subgroup_center quantiles -e expression.tsv -g ihc_groups.csv -o quantiles.tsv
  subgroup_center quantiles -e expression.tsv -g ihc_groups.csv --namespace-labels --json -o q.json"
    )]
    Quantiles {
        /// Path to expression matrix (genes x samples)
        #[arg(short, long,
            long_help = "Path to expression matrix file.\n\
                Format: first column = gene IDs, remaining columns = samples.\n\
                Supports both CSV (comma) and TSV (tab) delimiters (auto-detected).\n\
                NA, NaN, NULL or empty cells are read as missing.")]
        expression: String,

        /// Path to sample group table
        #[arg(short, long,
            long_help = "Path to sample group table.\n\
                Format: first column = sample IDs, one column per grouping scheme\n\
                (e.g. ER status, HER2 status). Empty/NA labels are unassigned.")]
        groups: String,

        /// Output file path [default: quantiles.tsv]
        #[arg(short, long, default_value = "quantiles.tsv")]
        output: String,

        /// Name output columns `scheme:label` instead of sharing labels across schemes
        #[arg(long)]
        namespace_labels: bool,

        /// Write JSON instead of TSV
        #[arg(long)]
        json: bool,
    },

    /// Center each gene on a quantile of its own distribution
    #[command(
        group(ArgGroup::new("source").required(true).args(["quantile", "quantile_file", "quantile_table"])),
        after_long_help = "\
Examples:
  # Plain median centering
  subgroup_center center -e expression.tsv --quantile 0.5 -o centered.tsv

  # Per-gene quantiles
  subgroup_center center -e expression.tsv --quantile-file gene_q.tsv -o centered.tsv

  # One group's column of a quantile table
  subgroup_center center -e expression.tsv --quantile-table quantiles.tsv --group HER2+"
    )]
    Center {
        /// Path to expression matrix (genes x samples)
        #[arg(short, long)]
        expression: String,

        /// Output file path [default: centered.tsv]
        #[arg(short, long, default_value = "centered.tsv")]
        output: String,

        /// Same quantile for every gene (0.5 = median centering)
        #[arg(short, long)]
        quantile: Option<f64>,

        /// Two-column file of gene ID and quantile
        #[arg(long, value_name = "FILE")]
        quantile_file: Option<String>,

        /// Quantile table written by the `quantiles` command
        #[arg(long, value_name = "FILE", requires = "group")]
        quantile_table: Option<String>,

        /// Group column of the quantile table to use for every gene
        #[arg(long, value_name = "LABEL")]
        group: Option<String>,
    },
}

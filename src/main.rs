//! subgroup_center command-line interface

use clap::Parser;
use log::{info, LevelFilter};

use subgroup_center::cli::{Cli, Commands};
use subgroup_center::prelude::*;

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    let result = match cli.command {
        Commands::Quantiles {
            expression,
            groups,
            output,
            namespace_labels,
            json,
        } => run_quantiles(&expression, &groups, &output, namespace_labels, json),
        Commands::Center {
            expression,
            output,
            quantile,
            quantile_file,
            quantile_table,
            group,
        } => run_center(
            &expression,
            &output,
            quantile,
            quantile_file.as_deref(),
            quantile_table.as_deref(),
            group.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_quantiles(
    expression_path: &str,
    groups_path: &str,
    output_path: &str,
    namespace_labels: bool,
    json: bool,
) -> Result<()> {
    info!("Loading expression matrix from: {}", expression_path);
    let expression = read_expression_matrix(expression_path)?;
    info!("  {} genes, {} samples", expression.n_genes(), expression.n_samples());

    info!("Loading groups from: {}", groups_path);
    let groups = read_group_table(groups_path)?;
    info!(
        "  {} samples, schemes: {}",
        groups.n_samples(),
        groups.scheme_names().join(", ")
    );

    let params = EstimateParams {
        label_policy: if namespace_labels {
            LabelPolicy::Namespaced
        } else {
            LabelPolicy::Shared
        },
    };
    let table = estimate_quantiles_with(&expression, &groups, &params)?;

    info!("Writing quantile table to: {}", output_path);
    if json {
        write_quantile_table_json(output_path, &table)?;
    } else {
        write_quantile_table(output_path, &table)?;
    }

    info!("Done!");
    Ok(())
}

fn run_center(
    expression_path: &str,
    output_path: &str,
    quantile: Option<f64>,
    quantile_file: Option<&str>,
    quantile_table: Option<&str>,
    group: Option<&str>,
) -> Result<()> {
    info!("Loading expression matrix from: {}", expression_path);
    let expression = read_expression_matrix(expression_path)?;
    info!("  {} genes, {} samples", expression.n_genes(), expression.n_samples());

    let gene_quantile = match (quantile, quantile_file, quantile_table, group) {
        (Some(q), _, _, _) => {
            info!("Centering every gene at quantile {}", q);
            GeneQuantileMap::constant(expression.gene_ids(), q)
        }
        (None, Some(path), _, _) => {
            info!("Loading gene quantiles from: {}", path);
            read_gene_quantiles(path)?
        }
        (None, None, Some(path), Some(label)) => {
            info!("Using group '{}' of quantile table: {}", label, path);
            let table = read_quantile_table(path)?;
            GeneQuantileMap::from_table_column(&table, label)?
        }
        _ => {
            return Err(CenteringError::InvalidInput {
                reason: "one of --quantile, --quantile-file or --quantile-table with --group is required"
                    .to_string(),
            });
        }
    };

    let centered = center_rows(&expression, &gene_quantile)?;

    info!("Writing centered matrix to: {}", output_path);
    write_expression_matrix(output_path, &centered)?;

    info!("Done!");
    Ok(())
}

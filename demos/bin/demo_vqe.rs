//! VQE demo: H2 ground state with an SPSA classical loop.

use std::path::PathBuf;

use anyhow::{Context, Result};
use arvak_demos::problems::Molecule;
use arvak_demos::runners::{DEFAULT_MAXITER, VqeRunner};
use arvak_demos::{
    create_progress_bar, print_header, print_info, print_result, print_section, print_success,
    print_warning,
};
use arvak_spsa::SpsaConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "demo-vqe", about = "VQE for H2 driven by the SPSA optimizer")]
struct Args {
    /// Molecule to simulate.
    #[arg(long, value_enum, default_value_t = Molecule::H2)]
    molecule: Molecule,

    /// Ansatz repetitions.
    #[arg(long, default_value_t = 1)]
    reps: usize,

    /// Shots per Pauli term.
    #[arg(long, env = "ARVAK_SHOTS", default_value_t = 1024)]
    shots: u32,

    /// Evaluate energies exactly instead of sampling.
    #[arg(long)]
    exact: bool,

    /// SPSA configuration file (YAML or JSON).
    #[arg(long, env = "ARVAK_SPSA_CONFIG")]
    config: Option<PathBuf>,

    /// Number of SPSA iterations. Overrides the config file.
    #[arg(long)]
    maxiter: Option<usize>,

    /// Seed for initial angles, perturbations and shot noise.
    #[arg(long, env = "ARVAK_SEED")]
    seed: Option<u64>,

    /// Keep the initial rotation layer fixed.
    #[arg(long)]
    freeze_first_layer: bool,

    /// Write the result as JSON.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn spsa_config(args: &Args) -> Result<SpsaConfig> {
    let mut config = match &args.config {
        Some(path) => SpsaConfig::from_file(path)
            .with_context(|| format!("loading SPSA config from {}", path.display()))?,
        None => SpsaConfig::new(DEFAULT_MAXITER),
    };
    if let Some(maxiter) = args.maxiter {
        config.maxiter = maxiter;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = spsa_config(&args)?;

    print_header("VQE with SPSA");

    let runner = VqeRunner::new(args.molecule.hamiltonian())
        .with_reps(args.reps)
        .with_shots((!args.exact).then_some(args.shots))
        .with_frozen_initial_layer(args.freeze_first_layer)
        .with_spsa(config.clone());

    print_section("Problem");
    print_result("Molecule", args.molecule.name());
    print_result("Qubits", runner.n_qubits);
    print_result("Pauli terms", runner.hamiltonian.num_terms());
    print_result(
        "Identity offset",
        format!("{:.6} Ha", runner.hamiltonian.identity_coefficient()),
    );
    print_result("Ansatz parameters", runner.ansatz().num_parameters());
    match runner.shots {
        Some(shots) => print_result("Shots per term", shots),
        None => print_result("Shots per term", "exact"),
    }

    print_section("Optimizer");
    print_result("Iterations", config.maxiter);
    print_result("c", config.c);
    print_result("alpha", config.alpha);
    print_result("gamma", config.gamma);
    if args.freeze_first_layer {
        print_info("Initial rotation layer is frozen");
    }

    print_section("Optimization");
    let pb = create_progress_bar(config.maxiter as u64, "SPSA");
    let result = runner.run_with_progress(Some(&pb))?;
    pb.finish_and_clear();

    print_section("Results");
    print_result("Final energy", format!("{:.6} Ha", result.optimal_energy));
    print_result("Exact ground state", format!("{:.6} Ha", result.reference_energy));
    print_result("Error", format!("{:.2e} Ha", result.error()));
    print_result("Energy estimates", result.circuit_evaluations);

    if result.error() < 1.6e-3 {
        print_success("Reached chemical accuracy");
    } else {
        print_warning("Did not reach chemical accuracy; try more iterations or shots");
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing result to {}", path.display()))?;
        print_info(&format!("Result written to {}", path.display()));
    }

    Ok(())
}

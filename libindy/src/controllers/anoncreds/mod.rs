mod prover;

pub use prover::ProverController;

// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (JWT auth + active user check)
pub mod public; // /, /health
pub mod protected; // /hello/, /process-incantation/, /sigils/*

// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Quill Protocol: Core Library
//!
//! Quill composes, signs and submits transactions for an account-based
//! ledger on secp256k1. It is a load and scenario tool: one prompt command
//! turns into a batch of correctly sequenced, correctly signed
//! transactions.
//!
//! ## Architecture
//!
//! - **config**: Network parameters, milestones, fees and limits.
//! - **crypto**: Hashing, ECDSA and Schnorr key pairs, signatures.
//! - **identity**: Addresses and m-of-n threshold identities.
//! - **nonce**: Per-sender nonce allocation for the life of the process.
//! - **transaction**: Drafts, assets, the canonical codec, signing and
//!   verification.
//! - **network**: The ledger read and dispatch boundary.
//! - **settings**: The TOML settings a run is driven by.
//! - **batch**: One command end to end: plan, gather, build, dispatch.
//!
//! ## Ground Rules
//!
//! 1. Every ledger read happens before the first unit of a batch is built.
//! 2. Nothing that fails self-verification leaves the library, except a
//!    threshold transaction still waiting for co-signers.
//! 3. The signature scheme is always an argument, never ambient state.

pub mod batch;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod network;
pub mod nonce;
pub mod settings;
pub mod transaction;

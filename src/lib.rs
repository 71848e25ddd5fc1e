//! Phonorules: a rule compiler and runtime matchers for letter-to-phoneme
//! conversion, lexical rewriting and voice databases.

pub mod config;
pub mod database;
pub mod matcher;
pub mod phoneme;
pub mod rules;

#![cfg(test)]

mod constructors;
mod expr;
mod instances;
mod matching;
mod optics;
mod retry;
mod util;

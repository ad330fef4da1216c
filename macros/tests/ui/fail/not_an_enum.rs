#![allow(dead_code)]
use shopfront_macros::Action;

#[derive(Action)]
struct InvoiceAction {
    id: u64,
}

fn main() {}

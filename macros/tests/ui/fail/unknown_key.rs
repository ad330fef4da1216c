#![allow(dead_code)]
use shopfront_macros::Action;

#[derive(Action)]
#[action(prefix = "invoice")]
enum InvoiceAction {
    #[request]
    SaveInvoiceRequest,
}

fn main() {}

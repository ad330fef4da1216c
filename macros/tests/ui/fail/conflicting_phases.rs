#![allow(dead_code)]
use shopfront_macros::Action;

#[derive(Action)]
enum InvoiceAction {
    #[request]
    #[success]
    SaveInvoice,
}

fn main() {}

use shopfront_macros::Action;

#[derive(Action)]
#[action(namespace = "invoice")]
enum InvoiceAction {
    #[request]
    SaveInvoiceRequest,
    #[success]
    SaveInvoiceSuccess { id: u64 },
    #[failure]
    SaveInvoiceFailure(String),
}

fn main() {
    assert_eq!(InvoiceAction::SAVE_INVOICE_REQUEST, "invoice/SAVE_INVOICE_REQUEST");
    assert!(InvoiceAction::SaveInvoiceSuccess { id: 1 }.is_success());
    assert!(InvoiceAction::SaveInvoiceFailure(String::new()).is_failure());
}

endpoints! {
    /// Payments endpoints on `api.mercadopago.com`.
    MercadoPagoApi {
        fn payment(payment_id) => Get "/v1/payments/{payment_id}";
        /// Send an idempotency key with this call so retries cannot double-charge.
        fn create_payment() => Post "/v1/payments";
        fn update_payment(payment_id) => Put "/v1/payments/{payment_id}";
        fn search_payments() => Get "/v1/payments/search";
        fn refunds(payment_id) => Get "/v1/payments/{payment_id}/refunds";
        fn refund_payment(payment_id) => Post "/v1/payments/{payment_id}/refunds";
        fn create_preference() => Post "/checkout/preferences";
        fn preference(preference_id) => Get "/checkout/preferences/{preference_id}";
        fn update_preference(preference_id) => Put "/checkout/preferences/{preference_id}";
        fn search_preferences() => Get "/checkout/preferences/search";
        fn customer(customer_id) => Get "/v1/customers/{customer_id}";
        fn create_customer() => Post "/v1/customers";
        fn update_customer(customer_id) => Put "/v1/customers/{customer_id}";
        fn delete_customer(customer_id) => Delete "/v1/customers/{customer_id}";
        fn search_customers() => Get "/v1/customers/search";
        fn customer_cards(customer_id) => Get "/v1/customers/{customer_id}/cards";
        fn merchant_order(merchant_order_id) => Get "/merchant_orders/{merchant_order_id}";
        fn search_merchant_orders() => Get "/merchant_orders/search";
        fn create_card_token() => Post "/v1/card_tokens";
        fn preapproval(preapproval_id) => Get "/preapproval/{preapproval_id}";
        fn create_preapproval() => Post "/preapproval";
        fn update_preapproval(preapproval_id) => Put "/preapproval/{preapproval_id}";
    }
}

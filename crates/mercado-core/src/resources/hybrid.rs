endpoints! {
    /// Cross-platform endpoints served from the Mercado Pago host with their
    /// own credential.
    HybridApi {
        fn payment_methods() => Get "/v1/payment_methods";
        fn installments() => Get "/v1/payment_methods/installments";
        fn card_issuers() => Get "/v1/payment_methods/card_issuers";
        fn identification_types() => Get "/v1/identification_types";
        fn account_balance(user_id) => Get "/users/{user_id}/mercadopago_account/balance";
        fn point_devices() => Get "/point/integration-api/devices";
        fn create_point_payment_intent(device_id) => Post "/point/integration-api/devices/{device_id}/payment-intents";
        fn point_payment_intent(payment_intent_id) => Get "/point/integration-api/payment-intents/{payment_intent_id}";
    }
}

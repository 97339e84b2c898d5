endpoints! {
    /// Marketplace endpoints on `api.mercadolibre.com`.
    MercadoLibreApi {
        /// Authenticated user.
        fn me() => Get "/users/me";
        fn user(user_id) => Get "/users/{user_id}";
        fn user_addresses(user_id) => Get "/users/{user_id}/addresses";
        /// Item ids listed by a seller; filter with `status`, `offset`, `limit`.
        fn seller_items(user_id) => Get "/users/{user_id}/items/search";
        fn item(item_id) => Get "/items/{item_id}";
        /// Multiget; pass `ids` as a param.
        fn items() => Get "/items";
        fn create_item() => Post "/items";
        fn update_item(item_id) => Put "/items/{item_id}";
        fn item_description(item_id) => Get "/items/{item_id}/description";
        fn update_item_description(item_id) => Put "/items/{item_id}/description";
        fn search_items(site_id) => Get "/sites/{site_id}/search";
        fn site(site_id) => Get "/sites/{site_id}";
        fn site_categories(site_id) => Get "/sites/{site_id}/categories";
        fn category(category_id) => Get "/categories/{category_id}";
        fn category_attributes(category_id) => Get "/categories/{category_id}/attributes";
        fn order(order_id) => Get "/orders/{order_id}";
        /// Requires the `seller` param.
        fn search_orders() => Get "/orders/search";
        fn shipment(shipment_id) => Get "/shipments/{shipment_id}";
        fn search_questions() => Get "/questions/search";
        fn question(question_id) => Get "/questions/{question_id}";
        fn delete_question(question_id) => Delete "/questions/{question_id}";
        fn answer_question() => Post "/answers";
        fn notifications_missed() => Get "/missed_feeds";
    }
}

//! Route table of the admin panel and the login guard in front of it.

use storeadmin_auth::SessionStore;
use storeadmin_core::{OrderId, ProductId, ReturnId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`, the login page.
    Login,
    /// `/products`
    Products,
    /// `/products/:productId`
    Product(ProductId),
    /// `/dashboard`, the product manager's dashboard.
    ProductDashboard,
    /// `/inventory`
    InventoryDashboard,
    /// `/orders`
    OrderDashboard,
    /// `/orders/all`
    AllOrders,
    /// `/orders/refunds`
    Refunds,
    /// `/orders/returns`
    Returns,
    /// `/orders/:orderId`
    Order(OrderId),
    /// `/orders/returns/:returnId`
    Return(ReturnId),
}

impl Route {
    /// Match a path against the route table. Literal segments win over
    /// parameters, so `/orders/all` is never read as an order id.
    ///
    /// Query strings, fragments and a trailing slash are ignored. Numeric
    /// parameters that do not parse match nothing.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Login),
            ["products"] => Some(Route::Products),
            ["products", id] => id.parse().ok().map(Route::Product),
            ["dashboard"] => Some(Route::ProductDashboard),
            ["inventory"] => Some(Route::InventoryDashboard),
            ["orders"] => Some(Route::OrderDashboard),
            ["orders", "all"] => Some(Route::AllOrders),
            ["orders", "refunds"] => Some(Route::Refunds),
            ["orders", "returns"] => Some(Route::Returns),
            ["orders", "returns", id] => id.parse().ok().map(Route::Return),
            ["orders", id] => id.parse().ok().map(Route::Order),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Products => "/products".to_string(),
            Route::Product(id) => format!("/products/{id}"),
            Route::ProductDashboard => "/dashboard".to_string(),
            Route::InventoryDashboard => "/inventory".to_string(),
            Route::OrderDashboard => "/orders".to_string(),
            Route::AllOrders => "/orders/all".to_string(),
            Route::Refunds => "/orders/refunds".to_string(),
            Route::Returns => "/orders/returns".to_string(),
            Route::Order(id) => format!("/orders/{id}"),
            Route::Return(id) => format!("/orders/returns/{id}"),
        }
    }

    /// Everything but the login page needs a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Outcome of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(&'static str),
    NotFound,
}

pub fn resolve(path: &str, session: &SessionStore) -> Resolution {
    match Route::parse(path) {
        None => Resolution::NotFound,
        Some(route) if route.is_protected() && !session.is_authenticated() => {
            tracing::debug!(path, "no session, redirecting to login");
            Resolution::Redirect("/")
        }
        Some(route) => Resolution::Render(route),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use storeadmin_auth::Session;
    use storeadmin_core::AdminId;

    use super::*;

    fn logged_in() -> SessionStore {
        SessionStore::with_session(Session::new("tok", AdminId::new(1), Utc::now()))
    }

    #[test]
    fn literal_segments_win_over_parameters() {
        assert_eq!(Route::parse("/orders/all"), Some(Route::AllOrders));
        assert_eq!(Route::parse("/orders/refunds"), Some(Route::Refunds));
        assert_eq!(Route::parse("/orders/returns"), Some(Route::Returns));
        assert_eq!(Route::parse("/orders/42"), Some(Route::Order(OrderId::new(42))));
        assert_eq!(Route::parse("/orders/returns/7"), Some(Route::Return(ReturnId::new(7))));
    }

    #[test]
    fn parse_ignores_query_and_trailing_slash() {
        assert_eq!(Route::parse("/products/?page=2"), Some(Route::Products));
        assert_eq!(Route::parse("/products/P1#top"), Some(Route::Product(ProductId::from("P1"))));
        assert_eq!(Route::parse(""), Some(Route::Login));
    }

    #[test]
    fn unknown_paths_are_not_found() {
        let session = logged_in();
        assert_eq!(resolve("/settings", &session), Resolution::NotFound);
        assert_eq!(resolve("/orders/abc", &session), Resolution::NotFound);
        assert_eq!(resolve("/orders/returns/7/extra", &session), Resolution::NotFound);
    }

    #[test]
    fn protected_routes_redirect_without_session() {
        let session = SessionStore::new();
        assert_eq!(resolve("/inventory", &session), Resolution::Redirect("/"));
        assert_eq!(resolve("/orders/3", &session), Resolution::Redirect("/"));
        assert_eq!(resolve("/", &session), Resolution::Render(Route::Login));
    }

    #[test]
    fn session_unlocks_protected_routes() {
        let session = logged_in();
        assert_eq!(resolve("/inventory", &session), Resolution::Render(Route::InventoryDashboard));

        session.logout();
        assert_eq!(resolve("/inventory", &session), Resolution::Redirect("/"));
    }

    #[test]
    fn path_round_trips_through_parse() {
        for path in ["/", "/products", "/dashboard", "/orders/all", "/orders/returns/3", "/orders/8"] {
            let route = Route::parse(path).unwrap();
            assert_eq!(route.path(), path);
        }
    }
}

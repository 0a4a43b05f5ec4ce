//! Cache keys for the list views. Values are the JSON rows the list queries
//! return; there are no per-entity keys. Prefix invalidation relies on every
//! variant of a view sharing its prefix, so the brand-filtered product list
//! key starts with the plain product list key.

pub const TTL_LIST_SECONDS: u64 = 120;

pub const BRAND_PREFIX: &str = "agency:brand";
pub const PRODUCT_PREFIX: &str = "agency:product";
pub const CUSTOMER_PREFIX: &str = "agency:customer";

pub fn brand_list() -> String {
    BRAND_PREFIX.to_string()
}

pub fn product_list() -> String {
    PRODUCT_PREFIX.to_string()
}

pub fn product_list_by_brand(brand_name: &str) -> String {
    format!("{PRODUCT_PREFIX}:{brand_name}")
}

pub fn customer_list() -> String {
    CUSTOMER_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtered_product_key_shares_the_product_prefix() {
        assert!(product_list_by_brand("Acme").starts_with(PRODUCT_PREFIX));
        assert!(product_list().starts_with(PRODUCT_PREFIX));
    }

    #[test]
    fn prefixes_do_not_shadow_each_other() {
        assert!(!BRAND_PREFIX.starts_with(PRODUCT_PREFIX));
        assert!(!CUSTOMER_PREFIX.starts_with(PRODUCT_PREFIX));
        assert!(!PRODUCT_PREFIX.starts_with(BRAND_PREFIX));
    }
}

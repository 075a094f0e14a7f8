mod query_all_authorities;

pub use query_all_authorities::QueryAllAuthoritiesUseCase;

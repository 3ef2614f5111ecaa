pub mod upload {
    pub mod model;
    pub mod repository;
    pub mod repository_sql;
    pub mod schema;
}
pub mod user {
    pub mod model;
    pub mod repository;
    pub mod repository_sql;
    pub mod schema;
}
pub mod sweeper {
    pub mod service;
}

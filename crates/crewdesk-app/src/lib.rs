// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod book;
pub mod columns;
pub mod dashboard;
pub mod detail;
pub mod forms;
pub mod ids;
pub mod import;
pub mod model;
pub mod settings;
pub mod state;
pub mod table;
pub mod wizard;

pub use book::*;
pub use columns::*;
pub use dashboard::*;
pub use detail::*;
pub use forms::*;
pub use ids::*;
pub use import::*;
pub use model::*;
pub use settings::*;
pub use state::*;
pub use table::*;
pub use wizard::*;

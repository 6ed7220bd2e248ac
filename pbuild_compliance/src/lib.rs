//! Builders generated at build time from the fixture schemas in `schemas/`.
//!
//! The tests under `tests/` drive these Builders and decode their output
//! with an independent protobuf implementation.

pub mod thing {
    include!(concat!(env!("OUT_DIR"), "/thing_builder.rs"));
}

pub mod holder {
    include!(concat!(env!("OUT_DIR"), "/holder_builder.rs"));
}

pub mod outer {
    include!(concat!(env!("OUT_DIR"), "/outer_builder.rs"));
}

pub mod scalars {
    include!(concat!(env!("OUT_DIR"), "/scalars_builder.rs"));
}

pub mod tree {
    include!(concat!(env!("OUT_DIR"), "/tree_builder.rs"));
}

/* One package split over two schema files */
pub mod split {
    include!(concat!(env!("OUT_DIR"), "/split_account_builder.rs"));
    include!(concat!(env!("OUT_DIR"), "/split_owner_builder.rs"));
}

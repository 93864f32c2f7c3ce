// Crate entry point. Re-export modules so tests and binaries can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.
//
// How it is used
// - Integration tests and the worker binary import modules from this crate root.

pub mod config;

pub mod core {
    pub mod association;
    pub mod member_link;
    pub mod ports;
}

pub mod application {
    pub mod errors;
    pub mod consumer {
        pub mod handler;
        pub mod runner;
    }
    pub mod sync {
        pub mod engine;
        pub mod loader;
        pub mod persister;
        pub mod receiver;
    }
    pub mod linking {
        pub mod handler;
    }
}

pub mod adapters {
    pub mod in_memory {
        pub mod in_memory_container_store;
        pub mod in_memory_member_store;
        pub mod in_memory_transport;
    }
}

pub mod shell;

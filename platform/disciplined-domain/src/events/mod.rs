pub mod domain_event;

pub mod random_string;

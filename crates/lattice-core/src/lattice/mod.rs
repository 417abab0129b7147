pub mod crr;

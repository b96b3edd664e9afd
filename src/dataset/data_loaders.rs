pub mod image_flow_loader;

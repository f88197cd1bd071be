pub mod box_painter;
pub mod image_file_display_sink;

#![allow(dead_code)]

use flow_dataset::dataset::data_decoders::flo_file::encode_flo;
use flow_dataset::{FrameShape, IterConfig};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs;
use std::path::Path;

pub const WIDTH: u32 = 3;
pub const HEIGHT: u32 = 2;

pub fn frame_shape() -> FrameShape {
    FrameShape {
        channels: 3,
        height: HEIGHT as i64,
        width: WIDTH as i64,
    }
}

pub fn config(root: &Path, batch_size: usize, frame_rate: usize, shuffle: bool) -> IterConfig {
    IterConfig::new(root, batch_size, frame_rate, shuffle, frame_shape())
}

/// Flow file whose x displacement is `start` and y displacement is `-start` everywhere
pub fn write_flow(root: &Path, sequence: &str, start: u64) {
    let flows_dir = root.join(sequence).join("flows");
    fs::create_dir_all(&flows_dir).unwrap();
    let values: Vec<f32> = (0..WIDTH * HEIGHT)
        .flat_map(|_| vec![start as f32, -(start as f32)])
        .collect();
    fs::write(
        flows_dir.join(format!("{}_{}.flo", start, start + 1)),
        encode_flo(WIDTH as i32, HEIGHT as i32, &values),
    )
    .unwrap();
}

/// Image filled with (id, 0, 0), label filled with id, and its `frame_rate` flow steps
pub fn write_frame(root: &Path, sequence: &str, id: u64, frame_rate: u64) {
    let images_dir = root.join(sequence).join("images");
    let annot_dir = root.join(sequence).join("annot");
    fs::create_dir_all(&images_dir).unwrap();
    fs::create_dir_all(&annot_dir).unwrap();

    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([id as u8, 0, 0]))
        .save(images_dir.join(format!("{}.png", id)))
        .unwrap();
    GrayImage::from_pixel(WIDTH, HEIGHT, Luma([id as u8]))
        .save(annot_dir.join(format!("{}_{:06}_L.png", sequence, id)))
        .unwrap();
    for start in id..id + frame_rate {
        write_flow(root, sequence, start);
    }
}

/// A sequence with frames 0..nb_frames listed in files.txt
pub fn write_sequence(root: &Path, sequence: &str, nb_frames: u64, frame_rate: u64) {
    fs::create_dir_all(root.join(sequence)).unwrap();
    let ids: Vec<String> = (0..nb_frames).map(|id| id.to_string()).collect();
    let mut index = ids.join("\n");
    if !ids.is_empty() {
        index.push('\n');
    }
    fs::write(root.join(sequence).join("files.txt"), index).unwrap();
    for id in 0..nb_frames {
        write_frame(root, sequence, id, frame_rate);
    }
}

/// `.pfm` flow step whose first channel is `start`, second `-start`, third 99
pub fn write_pfm_flow(root: &Path, sequence: &str, start: u64) {
    let flows_dir = root.join(sequence).join("flows");
    fs::create_dir_all(&flows_dir).unwrap();
    let mut bytes = format!("PF\n{} {}\n-1.0\n", WIDTH, HEIGHT).into_bytes();
    for _ in 0..WIDTH * HEIGHT {
        for value in [start as f32, -(start as f32), 99.].iter() {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    fs::write(flows_dir.join(format!("{}_{}.pfm", start, start + 1)), bytes).unwrap();
}

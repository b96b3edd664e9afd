use crate::dataset::common_structs::FlowField;
use crate::dataset::error::{read_file_bytes, DatasetError, DatasetResult};
use image::DynamicImage;
use std::path::Path;
use tch::{Kind, Tensor};

/// Reads and decodes an image file
pub fn open_image(path: &Path) -> DatasetResult<DynamicImage> {
    let bytes = read_file_bytes(path)?;
    image::load_from_memory(&bytes).map_err(|e| DatasetError::ImageDecode {
        path: path.to_owned(),
        source: e,
    })
}

/// Channel first float tensor (channels, height, width), pixel values are kept in 0..255
pub fn from_img_to_tensor(img: &DynamicImage, channels: i64) -> Tensor {
    let (width, height, raw) = if channels == 1 {
        let luma = img.to_luma8();
        (luma.width(), luma.height(), luma.into_raw())
    } else {
        let rgb = img.to_rgb8();
        (rgb.width(), rgb.height(), rgb.into_raw())
    };
    Tensor::from_slice(raw.as_slice())
        .reshape([height as i64, width as i64, channels])
        .permute([2, 0, 1])
        .to_kind(Kind::Float)
}

/// Single channel label map (height, width)
pub fn from_label_to_tensor(img: &DynamicImage) -> Tensor {
    let luma = img.to_luma8();
    let (width, height) = (luma.width() as i64, luma.height() as i64);
    Tensor::from_slice(luma.into_raw().as_slice())
        .reshape([height, width])
        .to_kind(Kind::Float)
}

/// Flow field as a (height, width, 2) float tensor
pub fn from_flow_to_tensor(flow: &FlowField) -> Tensor {
    Tensor::from_slice(flow.data.as_slice()).reshape([flow.height as i64, flow.width as i64, 2])
}

/// Stacks tensors of equal shape along a new leading axis
pub fn stack(tensors: &[Tensor]) -> DatasetResult<Tensor> {
    Ok(Tensor::f_stack(tensors, 0)?)
}

/// Fails with `ShapeMismatch` unless `tensor` has exactly the `expected` shape
pub fn ensure_shape(path: &Path, tensor: &Tensor, expected: &[i64]) -> DatasetResult<()> {
    let found = tensor.size();
    if found.as_slice() != expected {
        return Err(DatasetError::ShapeMismatch {
            path: path.to_owned(),
            expected: expected.to_vec(),
            found,
        });
    }
    Ok(())
}

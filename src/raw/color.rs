//! Camera → sRGB colour matrices
//!
//! The camera matrix from rawloader maps XYZ to camera RGB. Combining it with
//! the sRGB primaries and normalising each row so that sRGB white lands on
//! camera (1, 1, 1) gives `cam_rgb`; its inverse converts white-balanced
//! camera values to linear sRGB.

pub type Matrix3 = [[f32; 3]; 3];

pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Linear sRGB (D65) to XYZ
const SRGB_TO_XYZ: Matrix3 = [
    [0.412_456_4, 0.357_576_1, 0.180_437_5],
    [0.212_672_9, 0.715_152_2, 0.072_175_0],
    [0.019_333_9, 0.119_192_0, 0.950_304_1],
];

pub fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0f32; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[r][k] * b[k][c]).sum();
        }
    }
    out
}

pub fn invert(m: &Matrix3) -> Option<Matrix3> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if !det.is_finite() || det.abs() < 1e-9 {
        return None;
    }

    let inv_det = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ])
}

/// Build the camera → linear sRGB matrix from the first three rows of the
/// camera's XYZ → camera matrix. Returns `None` for unknown cameras (all-zero
/// or singular matrices).
pub fn camera_to_srgb(xyz_to_cam: &[[f32; 3]; 4]) -> Option<Matrix3> {
    let xyz_to_cam = [xyz_to_cam[0], xyz_to_cam[1], xyz_to_cam[2]];
    let mut cam_rgb = multiply(&xyz_to_cam, &SRGB_TO_XYZ);

    for row in cam_rgb.iter_mut() {
        let sum: f32 = row.iter().sum();
        if !sum.is_finite() || sum.abs() < 1e-6 {
            return None;
        }
        for cell in row.iter_mut() {
            *cell /= sum;
        }
    }

    invert(&cam_rgb)
}

pub fn apply(m: &Matrix3, rgb: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
        m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
        m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
    ]
}

/// Two triangles covering normalised device coordinates.
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
    [-1.0, -1.0],
];

pub const QUAD_VERTEX_COUNT: usize = QUAD_VERTICES.len();

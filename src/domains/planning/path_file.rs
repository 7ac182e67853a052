use std::f64::consts::PI;

/// One line per configuration of the 6-DOF arm.
pub const VALUES_PER_LINE: usize = 6;

/// Render a planned path for the downstream consumer: the flat joint-sample
/// stream converted from radians to degrees, comma-separated, at most
/// [`VALUES_PER_LINE`] values per line. Line breaks go only between chunks,
/// so a path of L values carries floor((L-1)/6) breaks and no trailing
/// newline. An empty path renders as an empty file.
pub fn format_path_file(samples: &[f64]) -> String {
    samples
        .chunks(VALUES_PER_LINE)
        .map(|chunk| {
            chunk
                .iter()
                .map(|v| (v * 180.0 / PI).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

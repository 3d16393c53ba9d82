use std::path::Path;

use pncc_core::TfMatrix;

/// Compute median of a list.
fn median(xs: &mut [f32]) -> f32 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.sort_by(f32::total_cmp);
    let m = xs.len() / 2;
    if xs.len() % 2 == 1 {
        xs[m]
    } else {
        0.5 * (xs[m - 1] + xs[m])
    }
}

pub(super) fn summary_min_median_max(xs: &[f32]) -> (f32, f32, f32) {
    if xs.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let mut v = xs.to_vec();
    let med = median(&mut v);
    // median() leaves `v` sorted
    (v[0], med, v[v.len() - 1])
}

/// Header plus one line per frame: `frame,time_s,c0,c1,...`.
pub(super) fn feature_csv_rows(m: &TfMatrix, hop: usize, sample_rate: u32) -> Vec<String> {
    let mut rows = Vec::with_capacity(m.frames() + 1);
    let mut header = String::from("frame,time_s");
    for c in 0..m.bands() {
        header.push_str(&format!(",c{c}"));
    }
    rows.push(header);

    for (t, frame) in m.rows().enumerate() {
        let time_s = (t * hop) as f64 / f64::from(sample_rate);
        let mut line = format!("{t},{time_s:.4}");
        for v in frame {
            line.push_str(&format!(",{v:.6}"));
        }
        rows.push(line);
    }
    rows
}

pub(super) fn write_csv(path: &Path, rows: &[String]) -> std::io::Result<()> {
    use std::io::Write;
    let f = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(f);
    for line in rows {
        writeln!(w, "{line}")?;
    }
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_basic() {
        let mut v = vec![3.0, 1.0, 4.0, 1.5, 2.0];
        assert!((median(&mut v) - 2.0).abs() < 1e-6);
        let mut even = vec![4.0, 1.0, 3.0, 2.0];
        assert!((median(&mut even) - 2.5).abs() < 1e-6);
        let mut e: Vec<f32> = vec![];
        assert_eq!(median(&mut e), 0.0);
    }

    #[test]
    fn summary_of_values() {
        assert_eq!(summary_min_median_max(&[3.0, 1.0, 2.0]), (1.0, 2.0, 3.0));
        assert_eq!(summary_min_median_max(&[]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn csv_rows_have_header_and_times() {
        let m = TfMatrix::from_rows(vec![vec![0.5, 1.0], vec![0.25, 0.0]]).unwrap();
        let rows = feature_csv_rows(&m, 256, 16_000);
        assert_eq!(rows[0], "frame,time_s,c0,c1");
        assert_eq!(rows[1], "0,0.0000,0.500000,1.000000");
        assert_eq!(rows[2], "1,0.0160,0.250000,0.000000");
    }
}

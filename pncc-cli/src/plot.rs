#[cfg(feature = "visualise")]
pub fn plot_features(
    m: &pncc_core::TfMatrix,
    hop: usize,
    sample_rate: u32,
    fname: &str,
    out_file: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    use plotters::prelude::*;

    let frames = m.frames();
    let bands = m.bands();
    if frames == 0 || bands == 0 {
        return Ok(());
    }

    let root = BitMapBackend::new(out_file, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let frame_s = hop as f32 / sample_rate as f32;
    let t_max = frames as f32 * frame_s;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("PNCC of `{}`", fname), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0f32..t_max, 0.0f32..bands as f32)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Time (s)")
        .y_desc("Band")
        .x_label_formatter(&|x| format!("{:.2}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    let (vmin, vmax) = m.min_max().unwrap_or((0.0, 1.0));
    let inv = 1.0 / (vmax - vmin).max(1e-9);

    // Precompute a 257-entry color LUT
    let lut: Vec<RGBColor> = (0..=256)
        .map(|i| {
            let c = colorous::VIRIDIS.eval_continuous(i as f64 / 256.0);
            RGBColor(c.r, c.g, c.b)
        })
        .collect();

    let lut = &lut;
    chart.draw_series((0..frames).flat_map(move |t| {
        (0..bands).map(move |f| {
            let v = ((m.get(t, f) - vmin) * inv).clamp(0.0, 1.0);
            let color = lut[(v * 256.0) as usize];
            let x0 = t as f32 * frame_s;
            Rectangle::new(
                [(x0, f as f32), (x0 + frame_s, f as f32 + 1.0)],
                color.filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

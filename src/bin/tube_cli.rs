#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("tube_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    use tube_line::geom::{MeshSnapshot, Point3, TubeDiagnostics, TubeOptions};
    use tube_line::line::LineNode;

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const USAGE: &str = r#"tube_cli (tube-line)

USAGE:
  tube_cli list
  tube_cli run <scenario|all> [options]

SCENARIOS:
  straight
  quarter_turn
  u_turn
  zigzag
  helix
  append_remove

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.obj and/or <scenario>.snap to this dir (required for `all`)
  --obj <path>       Write OBJ (single scenario only)
  --snap <path>      Write snapshot text (single scenario only)
  --no-obj           Skip OBJ when using --out-dir
  --no-snap          Skip snapshot when using --out-dir
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut write_obj = true;
        let mut write_snap = true;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "--no-obj" => write_obj = false,
                "--no-snap" => write_snap = false,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() || snap_path.is_some() {
                return Err("use either --out-dir or --obj/--snap (not both)".to_string());
            }
            if !write_obj && !write_snap {
                return Err("nothing to write (both --no-obj and --no-snap set)".to_string());
            }

            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;

            if scenario_name == "all" {
                for scenario in Scenario::ALL {
                    run_one_scenario_to_dir(*scenario, dir, write_obj, write_snap, overwrite)?;
                }
                return Ok(());
            }

            let scenario = Scenario::from_str(scenario_name.as_str())
                .ok_or_else(|| unknown_scenario(&scenario_name))?;
            return run_one_scenario_to_dir(scenario, dir, write_obj, write_snap, overwrite);
        }

        if scenario_name == "all" {
            return Err("`run all` requires --out-dir".to_string());
        }

        let scenario =
            Scenario::from_str(scenario_name.as_str()).ok_or_else(|| unknown_scenario(&scenario_name))?;
        let output = run_scenario(scenario)?;

        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &output.text, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{}", output.text);
        }

        if let Some(path) = obj_path.as_deref() {
            write_obj_file(path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}: {}", output.name, output.diagnostics.summary());
        Ok(())
    }

    fn run_one_scenario_to_dir(
        scenario: Scenario,
        dir: &Path,
        write_obj: bool,
        write_snap: bool,
        overwrite: bool,
    ) -> Result<(), String> {
        let output = run_scenario(scenario)?;

        if write_snap {
            let path = dir.join(format!("{}.snap", output.name));
            write_text_file(&path, &output.text, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        if write_obj {
            let path = dir.join(format!("{}.obj", output.name));
            write_obj_file(&path, &output.mesh, output.name, overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!("{}: {}", output.name, output.diagnostics.summary());
        Ok(())
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn check_writable(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        check_writable(path, overwrite)?;
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, mesh: &MeshSnapshot, name: &str, overwrite: bool) -> Result<(), String> {
        check_writable(path, overwrite)?;

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let err = |e: std::io::Error| format!("write obj: {e}");

        writeln!(w, "# tube-line tube_cli").map_err(err)?;
        writeln!(w, "o {name}").map_err(err)?;
        for p in &mesh.vertices {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(err)?;
        }
        for uv in &mesh.uvs {
            writeln!(w, "vt {} {}", uv[0], uv[1]).map_err(err)?;
        }
        for n in &mesh.normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(err)?;
        }
        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (a + 1, b + 1, c + 1);
            writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").map_err(err)?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        // Collapse -0.0 so mirrored runs print identically.
        if q == 0.0 { 0.0 } else { q }
    }

    fn write_f64(out: &mut String, value: f64) {
        let value = quantize_f64(value);
        let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
    }

    fn write_values_line(out: &mut String, prefix: &str, values: &[f64]) {
        out.push_str(prefix);
        for &v in values {
            out.push(' ');
            write_f64(out, v);
        }
        out.push('\n');
    }

    fn write_diagnostics(out: &mut String, diag: &TubeDiagnostics) {
        let _ = writeln!(out, "tube_diag.point_count {}", diag.point_count);
        let _ = writeln!(out, "tube_diag.segment_count {}", diag.segment_count);
        let _ = writeln!(out, "tube_diag.ring_count {}", diag.ring_count);
        let _ = writeln!(out, "tube_diag.smoothed_turn_count {}", diag.smoothed_turn_count);
        let _ = writeln!(out, "tube_diag.max_turn_steps_used {}", diag.max_turn_steps_used);
        let _ = writeln!(out, "tube_diag.ignored_point_count {}", diag.ignored_point_count);
        let _ = writeln!(out, "tube_diag.warning_count {}", diag.warnings.len());
        for (idx, warning) in diag.warnings.iter().enumerate() {
            let _ = writeln!(out, "tube_diag.warning.{idx} {warning}");
        }
    }

    fn write_mesh(out: &mut String, mesh: &MeshSnapshot) {
        let _ = writeln!(out, "mesh.vertex_count {}", mesh.vertex_count());
        let _ = writeln!(out, "mesh.triangle_count {}", mesh.triangle_count());
        out.push_str("mesh.arc_length");
        write_values_line(out, "", &[mesh.arc_length]);

        let _ = writeln!(out, "mesh.positions {}", mesh.vertices.len());
        for p in &mesh.vertices {
            write_values_line(out, "p", p);
        }
        let _ = writeln!(out, "mesh.indices {}", mesh.indices.len());
        for [a, b, c] in mesh.triangles() {
            let _ = writeln!(out, "i {a} {b} {c}");
        }
        let _ = writeln!(out, "mesh.uvs {}", mesh.uvs.len());
        for uv in &mesh.uvs {
            write_values_line(out, "uv", uv);
        }
        let _ = writeln!(out, "mesh.normals {}", mesh.normals.len());
        for n in &mesh.normals {
            write_values_line(out, "n", n);
        }
    }

    fn snapshot_text(name: &str, options: &TubeOptions, node: &LineNode) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# tube-line snapshot v1");
        let _ = writeln!(out, "scenario {name}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        out.push_str("options.radius");
        write_values_line(&mut out, "", &[options.radius]);
        let _ = writeln!(out, "options.edges {}", options.edges);
        let _ = writeln!(out, "options.max_turn_steps {}", options.max_turn_steps);
        write_diagnostics(&mut out, &node.diagnostics());
        write_mesh(&mut out, node.snapshot());
        normalize_snapshot_text(&out)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        Straight,
        QuarterTurn,
        UTurn,
        Zigzag,
        Helix,
        AppendRemove,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::Straight,
            Scenario::QuarterTurn,
            Scenario::UTurn,
            Scenario::Zigzag,
            Scenario::Helix,
            Scenario::AppendRemove,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::Straight => "straight",
                Scenario::QuarterTurn => "quarter_turn",
                Scenario::UTurn => "u_turn",
                Scenario::Zigzag => "zigzag",
                Scenario::Helix => "helix",
                Scenario::AppendRemove => "append_remove",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|s| s.name() == name)
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        mesh: MeshSnapshot,
        diagnostics: TubeDiagnostics,
        text: String,
    }

    fn run_scenario(scenario: Scenario) -> Result<ScenarioOutput, String> {
        let (options, node) = match scenario {
            Scenario::Straight => scenario_straight()?,
            Scenario::QuarterTurn => scenario_quarter_turn()?,
            Scenario::UTurn => scenario_u_turn()?,
            Scenario::Zigzag => scenario_zigzag()?,
            Scenario::Helix => scenario_helix()?,
            Scenario::AppendRemove => scenario_append_remove()?,
        };

        let mesh = node.snapshot().clone();
        mesh.validate().map_err(|e| format!("{}: {e}", scenario.name()))?;

        Ok(ScenarioOutput {
            name: scenario.name(),
            text: snapshot_text(scenario.name(), &options, &node),
            diagnostics: node.diagnostics(),
            mesh,
        })
    }

    fn build(coords: &[[f64; 3]], options: TubeOptions) -> Result<(TubeOptions, LineNode), String> {
        let points: Vec<Point3> = coords.iter().copied().map(Point3::from).collect();
        let node = LineNode::new(&points, options).map_err(|e| e.to_string())?;
        Ok((options, node))
    }

    fn scenario_straight() -> Result<(TubeOptions, LineNode), String> {
        build(&[[0.0, 0.0, 0.0], [0.0, 0.0, 10.0]], TubeOptions::default())
    }

    fn scenario_quarter_turn() -> Result<(TubeOptions, LineNode), String> {
        build(
            &[[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [5.0, 5.0, 0.0]],
            TubeOptions::default().with_radius(0.5).with_edges(8),
        )
    }

    fn scenario_u_turn() -> Result<(TubeOptions, LineNode), String> {
        build(
            &[[0.0, 0.0, 0.0], [0.0, 6.0, 0.0], [0.0, 0.0, 0.0]],
            TubeOptions::default()
                .with_radius(0.5)
                .with_edges(8)
                .with_max_turn_steps(6),
        )
    }

    fn scenario_zigzag() -> Result<(TubeOptions, LineNode), String> {
        let coords: Vec<[f64; 3]> = (0..8)
            .map(|i| {
                let x = f64::from(i) * 2.0;
                let y = if i % 2 == 0 { 0.0 } else { 1.5 };
                [x, y, 0.0]
            })
            .collect();
        build(&coords, TubeOptions::default().with_radius(0.2).with_edges(6))
    }

    fn scenario_helix() -> Result<(TubeOptions, LineNode), String> {
        let coords: Vec<[f64; 3]> = (0..=48)
            .map(|i| {
                let t = f64::from(i) / 12.0 * std::f64::consts::TAU;
                [3.0 * t.cos(), 3.0 * t.sin(), 0.25 * t]
            })
            .collect();
        build(&coords, TubeOptions::default().with_radius(0.3).with_edges(10))
    }

    fn scenario_append_remove() -> Result<(TubeOptions, LineNode), String> {
        let (options, mut node) = build(
            &[[0.0, 0.0, 0.0], [4.0, 0.0, 0.0], [4.0, 4.0, 0.0]],
            TubeOptions::default().with_radius(0.4).with_edges(8),
        )?;
        let before = node.snapshot().clone();

        node.add(Point3::new(0.0, 4.0, 2.0), None);
        node.add(Point3::new(0.0, 0.0, 2.0), None);
        node.remove(2);

        if !node.snapshot().approx_eq(&before, 1e-9) {
            return Err("append_remove: removal did not restore the mesh".to_string());
        }
        Ok((options, node))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}

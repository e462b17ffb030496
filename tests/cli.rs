//! End-to-end tests of the `trackplot` binary.

use std::io::Write;
use std::process::{Command, Output};
use trackplot::{
    intervals::Interval,
    test_utilities::{bedfile_from, random_bedfile, temp_bedfile},
};

fn trackplot(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trackplot"))
        .args(args)
        .output()
        .expect("trackplot failed to run")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[test]
fn test_pockets_two_tracks() {
    let genes = bedfile_from(&[Interval::new("chr1", 100, 200), Interval::new("chr1", 5000, 5100)]);
    let peaks = bedfile_from(&[Interval::new("chr1", 210, 260)]);
    let genes_spec = format!("genes={}", genes.path().display());
    let peaks_spec = format!("peaks={}", peaks.path().display());

    let output = trackplot(&[
        "pockets",
        "--bed",
        &genes_spec,
        "--bed",
        &peaks_spec,
        "--gap-padding",
        "0",
    ]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines, vec!["chr1\t100\t260\t100\t260\t0\t160", "chr1\t5000\t5100\t5000\t5100\t160\t260"]);
}

#[test]
fn test_coords_random_inverse() {
    let bed = random_bedfile(50);
    let spec = format!("random={}", bed.path().display());
    let output = trackplot(&["coords", "--bed", &spec]);
    assert!(output.status.success());

    let mut previous: Option<u64> = None;
    for (i, line) in stdout_lines(&output).iter().enumerate() {
        let columns: Vec<&str> = line.split('\t').collect();
        assert_eq!(columns[0], i.to_string());
        let genomic: u64 = columns[1].parse().unwrap();
        // plot indices map to strictly increasing genomic positions
        if let Some(previous) = previous {
            assert!(genomic > previous);
        }
        previous = Some(genomic);
    }
}

#[test]
fn test_layout_zoomed() {
    let bed = bedfile_from(&[Interval::new("chr1", 0, 100)]);
    let spec = format!("a={}", bed.path().display());
    let args = [
        "layout",
        "--bed",
        spec.as_str(),
        "--gap-padding",
        "0",
        "--width",
        "840",
        "--height",
        "400",
    ];
    let output = trackplot(&args);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines[0].ends_with("\t0\t99\t40.000\t760.000\t120.000\t160.000"));

    let mut zoomed = args.to_vec();
    zoomed.extend(["--zoom", "4", "--anchor", "40"]);
    let output = trackplot(&zoomed);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines[0].ends_with("\t0\t99\t40.000\t3040.000\t120.000\t160.000"));
}

#[test]
fn test_uniprot_tracks() {
    let mut file = temp_bedfile();
    write!(
        file,
        r#"{{"features": [
            {{"type": "Domain", "location": {{"start": {{"value": 1}}, "end": {{"value": 10}}}}, "description": "PH"}},
            {{"type": "Region", "location": {{"start": {{"value": 5}}, "end": {{"value": 30}}}}}}
        ]}}"#
    )
    .unwrap();
    file.flush().unwrap();
    let path = file.path().display().to_string();
    let output = trackplot(&["layout", "--uniprot", &path]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Domain\tCODING_GENE\t0\t10\tPH\t+\t"));
    assert!(lines[1].starts_with("Region\tCODING_GENE\t4\t30\t.\t+\t"));
}

#[test]
fn test_errors_exit_nonzero() {
    let output = trackplot(&["pockets", "--bed", "no-equals-sign.bed"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("NAME=PATH"));

    let bed = bedfile_from(&[Interval::new("chr1", 10, 10)]);
    let spec = format!("a={}", bed.path().display());
    let output = trackplot(&["pockets", "--bed", &spec]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed"));

    // the same zero-width interval is fine on a point track
    let output = trackplot(&["pockets", "--bed", &spec, "--points", "a"]);
    assert!(output.status.success());
}

#[test]
fn test_clipped_padding_reported() {
    let bed = bedfile_from(&[Interval::new("chr1", 100, 110), Interval::new("chr1", 140, 150)]);
    let spec = format!("a={}", bed.path().display());
    let output = trackplot(&["pockets", "--bed", &spec, "--max-pocket-gap", "5"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Warning: gap padding"));
}

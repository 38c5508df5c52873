/// Bundles the plugin through nih_plug_xtask:
///
///   cargo xtask bundle circular-delay --release
///
/// The result lands in `target/bundled/` as `Circular Delay.clap` and
/// `Circular Delay.vst3`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}

fn main() -> anyhow::Result<()> {
    pagoda_viewer::viewer::run_viewer()
}

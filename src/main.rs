fn main() {
    arborist::cli::run();
}

fn main() {
    daily_jigsaw::run();
}

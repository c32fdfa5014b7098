mod platform;

fn main() {
    platform::run();
}

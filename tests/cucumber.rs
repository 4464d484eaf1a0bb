mod step_definitions;

use cucumber::World;

use step_definitions::initialization_steps::BoardgateWorld;

#[tokio::main]
async fn main() {
    BoardgateWorld::run("tests/features").await;
}

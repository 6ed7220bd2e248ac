/* Plugin command - protoc plugin protocol over stdin/stdout */

use pbuild_gen::plugin::run_stdio;

/* Execute the plugin command. Nothing but the response may reach stdout. */
pub fn run() -> anyhow::Result<()> {
  let stdin = std::io::stdin();
  let stdout = std::io::stdout();
  run_stdio(stdin.lock(), stdout.lock())
}
